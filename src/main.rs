use std::io::{self, BufRead};

use stash::prelude::*;

const SNAPSHOT_PATH: &str = "stash.db";

fn main() {
    let mut session = match Session::open("stash", SNAPSHOT_PATH) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("Error: {err}");
            return;
        }
    };

    println!("stash is ready. Enter commands, \"bye\" to quit.");
    for line in io::stdin().lock().lines() {
        let Ok(line) = line else {
            break;
        };
        if line.trim().eq_ignore_ascii_case("bye") {
            break;
        }

        match session.execute(&line) {
            Ok(output) => println!("{output}"),
            Err(err) => println!("Error: {err}"),
        }
    }

    println!("Goodbye.");
}

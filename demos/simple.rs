use stash::prelude::*;

fn main() {
    let script = [
        // To create a table simply:
        "build users name text age int primarykey name",
        // To add records simply:
        "add in users name Ada age 36",
        "add in users name Alan age 41",
        // Values with spaces go in quotes:
        "build towns name text region text primarykey name",
        "add in towns name 'New York' region East",
        // Changing and removing go by primary key:
        "change users Ada age 37",
        "kick out users Alan",
        "show users",
        // Tables sharing a column can be mixed together:
        "build badges id int name text primarykey id",
        "add in badges id 1 name Ada",
        "mix it up users badges name",
    ];

    let mut database = Database::new("demo");
    for line in script {
        let command = parse(line).expect("syntax error");
        let output = database.run_command(command).expect("run error");
        println!("{output}\n");
    }
}

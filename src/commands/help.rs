//! Help texts, one per command plus an overview.

pub const OVERVIEW_TOPIC: &str = "folderbot";

const OVERVIEW: &str = "folderbot keeps a virtual folder tree for every tenant and files \
attachment links inside it. Paths may be absolute or relative to the current directory, \
may climb with `..` and may end in `*` to address every entry of a folder.";

const TOPICS: [(&str, &str); 8] = [
    ("help", "help [command]\n  shows what a command does, or this overview"),
    ("tree", "tree\n  draws the whole folder tree, marking the current directory"),
    ("pwd", "pwd\n  prints the current working directory"),
    (
        "ls",
        "ls [path]\n  lists the entries of the folder at path, or of the current directory",
    ),
    (
        "cd",
        "cd [path]\n  changes the current directory to path, or to the root when omitted",
    ),
    (
        "mk",
        "mk path...\n  makes the folders at every path, including missing parents",
    ),
    (
        "rm",
        "rm path...\n  removes the files and folders at every path, with everything inside them",
    ),
    (
        "up",
        "up [path]\n  files every attachment as a link inside the folder at path, or the current directory",
    ),
];

pub fn topic(name: &str) -> Option<&'static str> {
    TOPICS
        .iter()
        .find(|(topic, _)| *topic == name)
        .map(|(_, text)| *text)
}

pub fn overview() -> String {
    let mut text = String::from(OVERVIEW);
    for (_, usage) in TOPICS {
        text.push_str("\n\n");
        text.push_str(usage);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_topic_starts_with_its_usage() {
        for (name, text) in TOPICS {
            assert!(text.starts_with(name), "help for {name} is mislabeled");
        }
    }

    #[test]
    fn overview_mentions_every_command() {
        let overview = overview();
        for (name, _) in TOPICS {
            assert!(overview.contains(&format!("\n\n{name}")));
        }
        assert_eq!(topic("nope"), None);
    }
}

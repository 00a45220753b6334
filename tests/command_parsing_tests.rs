use lottery_bot::bot::commands::Command;
use teloxide::utils::command::BotCommands;

#[cfg(test)]
mod command_parsing_tests {
    use super::*;

    #[test]
    fn test_help_and_start_parsing() {
        assert_eq!(Command::parse("/help", "testbot").unwrap(), Command::Help);
        assert_eq!(Command::parse("/start", "testbot").unwrap(), Command::Start);
    }

    #[test]
    fn test_create_with_title() {
        let cmd = Command::parse("/create Spring giveaway", "testbot").unwrap();
        assert_eq!(cmd, Command::Create("Spring giveaway".to_string()));
    }

    #[test]
    fn test_create_without_title() {
        let cmd = Command::parse("/create", "testbot").unwrap();
        assert_eq!(cmd, Command::Create(String::new()));
    }

    #[test]
    fn test_set_keeps_all_arguments() {
        let cmd = Command::parse("/set prize Mug Shirt Sticker", "testbot").unwrap();
        assert_eq!(cmd, Command::Set("prize Mug Shirt Sticker".to_string()));
    }

    #[test]
    fn test_manage_with_bot_mention() {
        let cmd = Command::parse("/manage@testbot draw", "testbot").unwrap();
        assert_eq!(cmd, Command::Manage("draw".to_string()));
    }

    #[test]
    fn test_info_and_prize_parsing() {
        assert_eq!(Command::parse("/info", "testbot").unwrap(), Command::Info);
        assert_eq!(Command::parse("/prize", "testbot").unwrap(), Command::Prize);
    }

    #[test]
    fn test_unknown_command() {
        assert!(Command::parse("/schedule", "testbot").is_err());
        assert!(Command::parse("not a command", "testbot").is_err());
    }

    #[test]
    fn test_command_names() {
        assert_eq!(Command::Create(String::new()).name(), "/create");
        assert_eq!(Command::Manage("start".to_string()).name(), "/manage");
    }

    #[test]
    fn test_descriptions_list_every_command() {
        let descriptions = Command::descriptions().to_string();
        for name in ["/help", "/start", "/create", "/set", "/info", "/manage", "/prize"] {
            assert!(descriptions.contains(name), "missing {name}");
        }
    }
}

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::utils::validation::{validate_lottery_title, validate_password};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingError {
    #[error("missing value for '{0}'")]
    MissingValue(String),
    #[error("unknown property '{0}'")]
    UnknownProperty(String),
    #[error("'{0}' is not a non-negative number")]
    InvalidNumber(String),
    #[error("'{0}' is neither a number nor a percentage")]
    InvalidWinnerSpec(String),
    #[error("{0}")]
    InvalidText(String),
}

/// How many participants win: an absolute count or a share of the entrants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WinnerSpec {
    Count(u64),
    Percent(u64),
}

impl WinnerSpec {
    /// Number of winners for `participants` entrants, capped at `participants`.
    pub fn resolve(&self, participants: usize) -> usize {
        let resolved = match self {
            WinnerSpec::Count(count) => u128::from(*count),
            // u64 * u64 always fits in u128
            WinnerSpec::Percent(percent) => participants as u128 * u128::from(*percent) / 100,
        };
        usize::try_from(resolved).map_or(participants, |count| count.min(participants))
    }
}

impl FromStr for WinnerSpec {
    type Err = SettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || SettingError::InvalidWinnerSpec(s.to_string());
        let is_digits = |v: &str| !v.is_empty() && v.chars().all(|c| c.is_ascii_digit());

        if is_digits(s) {
            return s.parse().map(WinnerSpec::Count).map_err(|_| invalid());
        }
        match s.strip_suffix('%') {
            Some(percent) if is_digits(percent) => {
                percent.parse().map(WinnerSpec::Percent).map_err(|_| invalid())
            }
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for WinnerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WinnerSpec::Count(count) => write!(f, "{count}"),
            WinnerSpec::Percent(percent) => write!(f, "{percent}%"),
        }
    }
}

/// A single `/set <property> <value...>` mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LotterySetting {
    Title(String),
    DrawnPeople(i64),
    WinnerPeople(WinnerSpec),
    Password(String),
    SamePrize(bool),
    Prize(String),
}

impl LotterySetting {
    /// Parses the text following `/set`. Values are whitespace separated
    /// words: titles and passwords are re-joined with spaces, prizes with
    /// newlines so each word becomes one prize.
    pub fn parse(args: &str) -> Result<Self, SettingError> {
        let mut words = args.split_whitespace();
        let property = words.next().unwrap_or_default().to_string();
        let values: Vec<&str> = words.collect();

        if property.is_empty() || values.is_empty() {
            return Err(SettingError::MissingValue(property));
        }

        match property.as_str() {
            "title" => {
                let title = values.join(" ");
                validate_lottery_title(&title).map_err(|e| SettingError::InvalidText(e.to_string()))?;
                Ok(LotterySetting::Title(title))
            }
            "drawn_people" => values[0]
                .parse::<u32>()
                .map(|n| LotterySetting::DrawnPeople(i64::from(n)))
                .map_err(|_| SettingError::InvalidNumber(values[0].to_string())),
            "winner_people" => values[0].parse().map(LotterySetting::WinnerPeople),
            "password" => {
                let password = values.join(" ");
                validate_password(&password).map_err(|e| SettingError::InvalidText(e.to_string()))?;
                Ok(LotterySetting::Password(password))
            }
            "same_prize" => Ok(LotterySetting::SamePrize(values[0] == "true")),
            "prize" => Ok(LotterySetting::Prize(values.join("\n"))),
            _ => Err(SettingError::UnknownProperty(property)),
        }
    }

    pub fn property(&self) -> &'static str {
        match self {
            LotterySetting::Title(_) => "title",
            LotterySetting::DrawnPeople(_) => "drawn_people",
            LotterySetting::WinnerPeople(_) => "winner_people",
            LotterySetting::Password(_) => "password",
            LotterySetting::SamePrize(_) => "same_prize",
            LotterySetting::Prize(_) => "prize",
        }
    }
}

/// Sub-commands of `/manage`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManageAction {
    Start,
    Pause,
    Cancel,
    Draw,
}

impl FromStr for ManageAction {
    type Err = SettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "start" => Ok(ManageAction::Start),
            "pause" => Ok(ManageAction::Pause),
            "cancel" => Ok(ManageAction::Cancel),
            "draw" => Ok(ManageAction::Draw),
            other => Err(SettingError::UnknownProperty(other.to_string())),
        }
    }
}

impl fmt::Display for ManageAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ManageAction::Start => "start",
            ManageAction::Pause => "pause",
            ManageAction::Cancel => "cancel",
            ManageAction::Draw => "draw",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_winner_spec_parsing() {
        assert_eq!("3".parse::<WinnerSpec>(), Ok(WinnerSpec::Count(3)));
        assert_eq!(" 25% ".parse::<WinnerSpec>(), Ok(WinnerSpec::Percent(25)));
        assert!("abc".parse::<WinnerSpec>().is_err());
        assert!("%".parse::<WinnerSpec>().is_err());
        assert!("-2".parse::<WinnerSpec>().is_err());
        assert!("1.5%".parse::<WinnerSpec>().is_err());
    }

    #[test]
    fn test_winner_spec_resolve() {
        assert_eq!(WinnerSpec::Percent(50).resolve(7), 3);
        assert_eq!(WinnerSpec::Percent(100).resolve(4), 4);
        assert_eq!(WinnerSpec::Count(2).resolve(10), 2);
        assert_eq!(WinnerSpec::Count(u64::MAX).resolve(4), 4);
        assert_eq!(WinnerSpec::Percent(u64::MAX).resolve(usize::MAX), usize::MAX);
        assert_eq!(WinnerSpec::Percent(1 << 63).resolve(2), 2);
        assert_eq!(WinnerSpec::Count(2).to_string(), "2");
        assert_eq!(WinnerSpec::Percent(30).to_string(), "30%");
    }

    #[test]
    fn test_parse_text_settings() {
        assert_eq!(
            LotterySetting::parse("title Friday  giveaway"),
            Ok(LotterySetting::Title("Friday giveaway".to_string()))
        );
        assert_eq!(
            LotterySetting::parse("password open sesame"),
            Ok(LotterySetting::Password("open sesame".to_string()))
        );
        assert_eq!(
            LotterySetting::parse("prize Book\nMug Poster"),
            Ok(LotterySetting::Prize("Book\nMug\nPoster".to_string()))
        );
    }

    #[test]
    fn test_parse_numeric_settings() {
        assert_eq!(LotterySetting::parse("drawn_people 20"), Ok(LotterySetting::DrawnPeople(20)));
        assert_eq!(
            LotterySetting::parse("winner_people 10%"),
            Ok(LotterySetting::WinnerPeople(WinnerSpec::Percent(10)))
        );
        assert!(matches!(
            LotterySetting::parse("drawn_people -1"),
            Err(SettingError::InvalidNumber(_))
        ));
        assert!(matches!(
            LotterySetting::parse("winner_people abc"),
            Err(SettingError::InvalidWinnerSpec(_))
        ));
    }

    #[test]
    fn test_parse_same_prize_only_accepts_literal_true() {
        assert_eq!(LotterySetting::parse("same_prize true"), Ok(LotterySetting::SamePrize(true)));
        assert_eq!(LotterySetting::parse("same_prize yes"), Ok(LotterySetting::SamePrize(false)));
        assert_eq!(LotterySetting::parse("same_prize TRUE"), Ok(LotterySetting::SamePrize(false)));
    }

    #[test]
    fn test_parse_rejects_unknown_or_empty() {
        assert_eq!(
            LotterySetting::parse("colour red"),
            Err(SettingError::UnknownProperty("colour".to_string()))
        );
        assert!(matches!(LotterySetting::parse("title"), Err(SettingError::MissingValue(_))));
        assert!(matches!(LotterySetting::parse(""), Err(SettingError::MissingValue(_))));
    }

    #[test]
    fn test_manage_action_parsing() {
        assert_eq!("start".parse::<ManageAction>(), Ok(ManageAction::Start));
        assert_eq!("draw".parse::<ManageAction>(), Ok(ManageAction::Draw));
        assert!("stop".parse::<ManageAction>().is_err());
        assert_eq!(ManageAction::Cancel.to_string(), "cancel");
    }
}

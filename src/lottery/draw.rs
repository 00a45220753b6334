use rand::seq::SliceRandom;
use rand::Rng;

use crate::database::models::{Lottery, Participant};
use crate::lottery::settings::WinnerSpec;

/// Handed to winners once a per-winner prize list runs out
pub const NO_PRIZE_LEFT: &str = "No prize left, please contact the organizer";

/// Number of winners for a lottery with `participants` entrants.
///
/// An all-digit spec is taken literally, `P%` is `floor(participants * P / 100)`
/// and anything unparseable falls back to half the entrants, rounded down.
/// The result never exceeds the number of entrants.
pub fn resolve_winner_count(winner_people: &str, participants: usize) -> usize {
    match winner_people.parse::<WinnerSpec>() {
        Ok(spec) => spec.resolve(participants),
        Err(_) => participants / 2,
    }
}

/// Uniform sample of `count` distinct participants.
pub fn pick_winners<R: Rng + ?Sized>(
    participants: &[Participant],
    count: usize,
    rng: &mut R,
) -> Vec<Participant> {
    participants.choose_multiple(rng, count).cloned().collect()
}

/// Pairs every winner with the prize they receive.
///
/// A shared prize goes to everyone. Otherwise prizes are popped from the end
/// of the list, and winners past its length get `NO_PRIZE_LEFT`.
pub fn assign_prizes(lottery: &Lottery, winners: Vec<Participant>) -> Vec<(Participant, String)> {
    if lottery.same_prize {
        return winners
            .into_iter()
            .map(|winner| (winner, lottery.prize.clone()))
            .collect();
    }

    let mut prizes = lottery.prize_list();
    winners
        .into_iter()
        .map(|winner| {
            let prize = prizes.pop().unwrap_or_else(|| NO_PRIZE_LEFT.to_string());
            (winner, prize)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::LotteryStatus;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn participants(n: i64) -> Vec<Participant> {
        (1..=n)
            .map(|i| Participant {
                id: i,
                user_id: 1000 + i,
                user_name: format!("user{i}"),
                lottery_id: 1,
                prize: None,
                joined_at: String::new(),
            })
            .collect()
    }

    fn lottery(same_prize: bool, prize: &str) -> Lottery {
        Lottery {
            id: 1,
            chat_id: -100,
            message_id: 10,
            creator_id: 42,
            title: "Giveaway".to_string(),
            status: LotteryStatus::Running,
            drawn_people: 0,
            winner_people: "50%".to_string(),
            password: "pw".to_string(),
            same_prize,
            prize: prize.to_string(),
            created_at: String::new(),
            finished_at: None,
        }
    }

    #[test]
    fn test_resolve_winner_count() {
        assert_eq!(resolve_winner_count("50%", 7), 3);
        assert_eq!(resolve_winner_count("2", 3), 2);
        assert_eq!(resolve_winner_count("10", 3), 3);
        assert_eq!(resolve_winner_count("abc", 7), 3);
        assert_eq!(resolve_winner_count("", 9), 4);
        assert_eq!(resolve_winner_count("150%", 4), 4);
        assert_eq!(resolve_winner_count("50%", 0), 0);
    }

    #[test]
    fn test_resolve_winner_count_huge_values_capped() {
        assert_eq!(resolve_winner_count("9223372036854775808%", 2), 2);
        assert_eq!(resolve_winner_count("18446744073709551615%", 3), 3);
        assert_eq!(resolve_winner_count("18446744073709551615", 5), 5);
        assert_eq!(resolve_winner_count("18446744073709551615%", 0), 0);
        // beyond u64 the spec no longer parses and half the entrants win
        assert_eq!(resolve_winner_count("99999999999999999999%", 6), 3);
    }

    #[test]
    fn test_pick_winners_distinct_subset() {
        let entrants = participants(10);
        let mut rng = StdRng::seed_from_u64(7);

        for count in 0..=10 {
            let winners = pick_winners(&entrants, count, &mut rng);
            assert_eq!(winners.len(), count);
            let ids: HashSet<i64> = winners.iter().map(|w| w.id).collect();
            assert_eq!(ids.len(), count);
            assert!(winners.iter().all(|w| entrants.contains(w)));
        }
    }

    #[test]
    fn test_pick_winners_caps_at_population() {
        let entrants = participants(3);
        let winners = pick_winners(&entrants, 5, &mut StdRng::seed_from_u64(1));
        assert_eq!(winners.len(), 3);
    }

    #[test]
    fn test_same_prize_goes_to_everyone() {
        let assigned = assign_prizes(&lottery(true, "VIP"), participants(3));
        assert_eq!(assigned.len(), 3);
        assert!(assigned.iter().all(|(_, prize)| prize == "VIP"));
    }

    #[test]
    fn test_prize_list_popped_then_fallback() {
        let assigned = assign_prizes(&lottery(false, "Book\nMug"), participants(3));
        let prizes: Vec<&str> = assigned.iter().map(|(_, p)| p.as_str()).collect();
        assert_eq!(prizes, vec!["Mug", "Book", NO_PRIZE_LEFT]);
    }

    #[test]
    fn test_blank_prize_lines_are_skipped() {
        let assigned = assign_prizes(&lottery(false, "Book\n\n  \nMug \n"), participants(3));
        let prizes: Vec<&str> = assigned.iter().map(|(_, p)| p.as_str()).collect();
        assert_eq!(prizes, vec!["Mug", "Book", NO_PRIZE_LEFT]);

        let assigned = assign_prizes(&lottery(false, ""), participants(1));
        assert_eq!(assigned[0].1, NO_PRIZE_LEFT);
    }
}

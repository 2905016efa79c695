//! Drawer rotation.

use doodle_protocol::{Player, PlayerId};

/// Picks the drawer that follows `current` in join order.
///
/// Wraps from the last player back to the first. If `current` is unset or
/// has already left the lobby, the first player draws. Returns `None` only
/// for an empty list.
pub fn next_drawer(players: &[Player], current: Option<PlayerId>) -> Option<PlayerId> {
    let next = current
        .and_then(|id| players.iter().position(|p| p.id == id))
        .map_or(0, |i| i + 1);
    players
        .get(next)
        .or_else(|| players.first())
        .map(|p| p.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn players(n: u64) -> Vec<Player> {
        (1..=n).map(|i| Player::new(PlayerId(i), format!("p{i}"))).collect()
    }

    #[test]
    fn test_empty_list_has_no_drawer() {
        assert_eq!(next_drawer(&[], None), None);
        assert_eq!(next_drawer(&[], Some(PlayerId(1))), None);
    }

    #[test]
    fn test_advances_to_next_in_join_order() {
        let list = players(3);
        assert_eq!(next_drawer(&list, Some(PlayerId(1))), Some(PlayerId(2)));
        assert_eq!(next_drawer(&list, Some(PlayerId(2))), Some(PlayerId(3)));
    }

    #[test]
    fn test_wraps_from_last_to_first() {
        let list = players(3);
        assert_eq!(next_drawer(&list, Some(PlayerId(3))), Some(PlayerId(1)));
    }

    #[test]
    fn test_single_player_draws_again() {
        let list = players(1);
        assert_eq!(next_drawer(&list, Some(PlayerId(1))), Some(PlayerId(1)));
    }

    #[test]
    fn test_missing_or_departed_drawer_falls_back_to_first() {
        let list = players(3);
        assert_eq!(next_drawer(&list, None), Some(PlayerId(1)));
        assert_eq!(next_drawer(&list, Some(PlayerId(99))), Some(PlayerId(1)));
    }

    #[test]
    fn test_full_cycle_visits_every_player_once() {
        for n in 1..=8 {
            let list = players(n);
            for start in &list {
                let mut seen = vec![start.id];
                let mut current = start.id;
                for _ in 1..n {
                    current = next_drawer(&list, Some(current)).unwrap();
                    assert!(!seen.contains(&current), "repeated {current} with n={n}");
                    seen.push(current);
                }
                assert_eq!(next_drawer(&list, Some(current)), Some(start.id));
                assert_eq!(seen.len() as u64, n);
            }
        }
    }
}

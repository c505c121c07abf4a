//! Client-side model of one simulated player.

use lobby_server::{IdentityMessage, PlayerRecord, ServerMessage, SessionId};
use rand::Rng;

const AVATARS: [&str; 5] = ["fox", "owl", "bear", "cat", "frog"];
const ROLES: [&str; 3] = ["explorer", "builder", "guide"];
const CHAT_MESSAGES: [&str; 6] = [
    "Hello everyone!",
    "Anyone want to team up?",
    "Found a nice spot here",
    "Heading north",
    "brb",
    "GG everyone",
];

/// A decoded server frame.
#[derive(Debug)]
pub enum Inbound {
    Identity(SessionId),
    Players(Vec<PlayerRecord>),
    Other(String),
}

impl Inbound {
    pub fn parse(text: &str) -> Self {
        if let Ok(ServerMessage::Players { players }) = serde_json::from_str(text) {
            return Inbound::Players(players);
        }
        match serde_json::from_str::<IdentityMessage>(text) {
            Ok(identity) => Inbound::Identity(identity.session_id),
            Err(_) => Inbound::Other(text.to_string()),
        }
    }
}

/// Simulated player state.
///
/// Positions are kept inside a square of `world_size` cells centred on the
/// origin, which is where the server places new records.
#[derive(Debug)]
pub struct SimulatedPlayer {
    index: u32,
    world_size: i32,
    session_id: Option<SessionId>,
    x: i32,
    y: i32,
    known_players: usize,
}

impl SimulatedPlayer {
    pub fn new(index: u32, world_size: i32) -> Self {
        Self {
            index,
            world_size: world_size.max(1),
            session_id: None,
            x: 0,
            y: 0,
            known_players: 0,
        }
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session_id
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn known_players(&self) -> usize {
        self.known_players
    }

    /// Forgets everything tied to the previous connection.
    ///
    /// A reconnect yields a fresh record on the server, so the simulated
    /// position starts over as well.
    pub fn reset(&mut self) {
        self.session_id = None;
        self.x = 0;
        self.y = 0;
        self.known_players = 0;
    }

    /// Commands sent right after connecting.
    pub fn profile_commands(&self) -> Vec<String> {
        let avatar = AVATARS[self.index as usize % AVATARS.len()];
        let role = ROLES[self.index as usize % ROLES.len()];
        vec![
            format!("name:Player {}", self.index + 1),
            format!("avatar:{avatar}"),
            format!("role:{role}"),
        ]
    }

    /// Takes one random-walk step and returns the `move:` command for it.
    pub fn step<R: Rng>(&mut self, rng: &mut R) -> String {
        let half = self.world_size / 2;
        self.x = (self.x + rng.gen_range(-1..=1)).clamp(-half, half);
        self.y = (self.y + rng.gen_range(-1..=1)).clamp(-half, half);
        format!("move:{},{}", self.x, self.y)
    }

    pub fn chat<R: Rng>(&self, rng: &mut R) -> String {
        let message = CHAT_MESSAGES[rng.gen_range(0..CHAT_MESSAGES.len())];
        format!("say:{message}")
    }

    /// Applies a server frame to the local view.
    pub fn observe(&mut self, inbound: &Inbound) {
        match inbound {
            Inbound::Identity(session_id) => self.session_id = Some(*session_id),
            Inbound::Players(players) => self.known_players = players.len(),
            Inbound::Other(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_profile_commands_are_recognized() {
        let player = SimulatedPlayer::new(3, 20);
        let commands = player.profile_commands();
        assert_eq!(commands[0], "name:Player 4");
        for command in &commands {
            assert!(lobby_server::Command::parse(command).is_recognized(), "{command}");
        }
    }

    #[test]
    fn test_random_walk_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut player = SimulatedPlayer::new(0, 6);

        for _ in 0..500 {
            let (old_x, old_y) = player.position();
            let command = player.step(&mut rng);
            let (x, y) = player.position();

            assert!((x - old_x).abs() <= 1 && (y - old_y).abs() <= 1);
            assert!((-3..=3).contains(&x) && (-3..=3).contains(&y));
            assert_eq!(
                lobby_server::Command::parse(&command),
                lobby_server::Command::Move { x, y }
            );
        }
    }

    #[test]
    fn test_chat_is_a_say_command() {
        let mut rng = StdRng::seed_from_u64(1);
        let player = SimulatedPlayer::new(0, 10);
        assert!(player.chat(&mut rng).starts_with("say:"));
    }

    #[test]
    fn test_observe_frames() {
        let mut player = SimulatedPlayer::new(0, 10);
        let id = SessionId::new();

        let identity = Inbound::parse(&format!(r#"{{"sessionId":"{id}"}}"#));
        player.observe(&identity);
        assert_eq!(player.session_id(), Some(id));

        let frame = ServerMessage::Players {
            players: vec![PlayerRecord::new(id), PlayerRecord::new(SessionId::new())],
        }
        .to_json()
        .unwrap();
        player.observe(&Inbound::parse(&frame));
        assert_eq!(player.known_players(), 2);

        assert!(matches!(Inbound::parse("not json"), Inbound::Other(_)));

        player.reset();
        assert_eq!(player.session_id(), None);
        assert_eq!(player.position(), (0, 0));
    }
}

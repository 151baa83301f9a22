//! Test fixture shared by the use case tests.

use std::sync::{Arc, Mutex};

use agora_shared::time::{Clock, ManualClock};
use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::{
    domain::{
        Debate, DebateRepository, DebateType, NewDebate, RoomBroadcaster, RoomEvent, RoomId,
        UserId, UserProfile,
    },
    infrastructure::repository::{
        InMemoryDebateRepository, InMemoryPointsService, InMemoryUserDirectory,
    },
};

use super::{locks::DebateLocks, roster::RosterPublisher};

/// Broadcaster that records every published event.
#[derive(Default)]
pub struct RecordingBroadcaster {
    events: Mutex<Vec<(RoomId, RoomEvent)>>,
}

impl RecordingBroadcaster {
    /// Drain the events published so far.
    pub fn take(&self) -> Vec<(RoomId, RoomEvent)> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }
}

impl RoomBroadcaster for RecordingBroadcaster {
    fn publish(&self, room_id: &RoomId, event: RoomEvent) {
        self.events.lock().unwrap().push((room_id.clone(), event));
    }
}

pub fn user(id: &str) -> UserId {
    UserId::new(id.to_string()).unwrap()
}

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap()
}

pub struct Fixture {
    pub repository: Arc<InMemoryDebateRepository>,
    pub users: Arc<InMemoryUserDirectory>,
    pub points: Arc<InMemoryPointsService>,
    pub broadcaster: Arc<RecordingBroadcaster>,
    pub clock: Arc<ManualClock>,
    pub locks: Arc<DebateLocks>,
    pub roster: Arc<RosterPublisher>,
}

impl Fixture {
    pub fn new() -> Self {
        let repository = Arc::new(InMemoryDebateRepository::new());
        let users = Arc::new(InMemoryUserDirectory::with_profiles([UserProfile {
            user_id: user("host"),
            display_name: "Hana Host".to_string(),
            handle: "hana".to_string(),
            avatar_url: "https://example.com/hana.png".to_string(),
        }]));
        let broadcaster = Arc::new(RecordingBroadcaster::default());
        let roster = Arc::new(RosterPublisher::new(
            repository.clone(),
            users.clone(),
            broadcaster.clone(),
        ));

        Self {
            repository,
            users,
            points: Arc::new(InMemoryPointsService::new()),
            broadcaster,
            clock: Arc::new(ManualClock::new(t0())),
            locks: Arc::new(DebateLocks::new()),
            roster,
        }
    }

    /// Store an ACTIVE 60 minute debate hosted by `host`.
    pub async fn seed_debate(&self) -> Debate {
        let debate = Debate::schedule(
            NewDebate {
                title: "Should cities ban cars?".to_string(),
                description: String::new(),
                category: "urbanism".to_string(),
                host_id: user("host"),
                debate_type: DebateType::Public,
                start_time: self.clock.now(),
                duration_minutes: 60,
                show_in_pulse: true,
            },
            self.clock.now(),
        );
        self.repository.create_debate(debate.clone()).await.unwrap();
        debate
    }

    /// Store a debate starting `minutes_ahead` from now.
    pub async fn seed_scheduled_debate(&self, minutes_ahead: i64, duration_minutes: u32) -> Debate {
        let debate = Debate::schedule(
            NewDebate {
                title: "Later".to_string(),
                description: String::new(),
                category: String::new(),
                host_id: user("host"),
                debate_type: DebateType::Public,
                start_time: self.clock.now() + Duration::minutes(minutes_ahead),
                duration_minutes,
                show_in_pulse: true,
            },
            self.clock.now(),
        );
        self.repository.create_debate(debate.clone()).await.unwrap();
        debate
    }
}

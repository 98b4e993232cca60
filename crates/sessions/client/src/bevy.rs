use std::sync::{Arc, Mutex};

use bevy::prelude::*;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use sessions_shared::bevy::{
    CreateSessionCompleteEvent, DestroySessionCompleteEvent, FindSessionsCompleteEvent,
    JoinSessionCompleteEvent, StartSessionCompleteEvent,
};
use sessions_shared::SessionNotification;

/// Channel carrying coordinator notifications into the ECS.
///
/// Hand [`sender`](Self::sender) to
/// [`SessionCoordinator::add_listener`](crate::SessionCoordinator::add_listener);
/// the plugin's pump system drains the receiver every `PreUpdate`.
#[derive(Resource)]
pub struct SessionEventChannel {
    sender: UnboundedSender<SessionNotification>,
    receiver: Arc<Mutex<UnboundedReceiver<SessionNotification>>>,
}

impl Default for SessionEventChannel {
    fn default() -> Self {
        let (sender, receiver) = unbounded_channel();
        Self {
            sender,
            receiver: Arc::new(Mutex::new(receiver)),
        }
    }
}

impl SessionEventChannel {
    pub fn sender(&self) -> UnboundedSender<SessionNotification> {
        self.sender.clone()
    }
}

/// Registers the session completion events and the notification pump.
pub struct SessionsClientPlugin {
    pub initialize_later: bool,
}

impl Default for SessionsClientPlugin {
    fn default() -> Self {
        Self {
            initialize_later: false,
        }
    }
}

impl Plugin for SessionsClientPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<CreateSessionCompleteEvent>()
            .add_event::<FindSessionsCompleteEvent>()
            .add_event::<JoinSessionCompleteEvent>()
            .add_event::<DestroySessionCompleteEvent>()
            .add_event::<StartSessionCompleteEvent>();

        if !self.initialize_later && !app.world().contains_resource::<SessionEventChannel>() {
            app.insert_resource(SessionEventChannel::default());
        }

        app.add_systems(
            PreUpdate,
            pump_session_notifications.run_if(resource_exists::<SessionEventChannel>),
        );
    }
}

fn pump_session_notifications(
    channel: Res<SessionEventChannel>,
    mut create_writer: EventWriter<CreateSessionCompleteEvent>,
    mut find_writer: EventWriter<FindSessionsCompleteEvent>,
    mut join_writer: EventWriter<JoinSessionCompleteEvent>,
    mut destroy_writer: EventWriter<DestroySessionCompleteEvent>,
    mut start_writer: EventWriter<StartSessionCompleteEvent>,
) {
    let mut receiver = channel
        .receiver
        .lock()
        .expect("session notification receiver poisoned");
    while let Ok(notification) = receiver.try_recv() {
        match notification {
            SessionNotification::CreateSessionComplete { success } => {
                create_writer.write(CreateSessionCompleteEvent { success });
            }
            SessionNotification::FindSessionsComplete { results, success } => {
                find_writer.write(FindSessionsCompleteEvent { results, success });
            }
            SessionNotification::JoinSessionComplete { result } => {
                join_writer.write(JoinSessionCompleteEvent(result));
            }
            SessionNotification::DestroySessionComplete { success } => {
                destroy_writer.write(DestroySessionCompleteEvent { success });
            }
            SessionNotification::StartSessionComplete { success } => {
                start_writer.write(StartSessionCompleteEvent { success });
            }
        }
    }
}

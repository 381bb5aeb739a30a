use anyhow::Result;
use async_trait::async_trait;
use desk_shared::{domain::ConnectionStatus, protocol::DeskEvent};
use tokio::sync::broadcast;

pub mod context;
pub mod controller;
pub mod log_store;
pub mod shortcut_store;
pub mod simulator;

pub use context::{DeskContext, DeskSnapshot};
pub use controller::{
    ControllerOptions, DeskController, DeskState, EventSubscription, MoveError, MoveOutcome,
};
pub use log_store::LogStore;
pub use shortcut_store::ShortcutStore;
pub use simulator::SimulatedDesk;

/// Heights cross this boundary as integers in backend units (tenths of a
/// centimeter). Every operation may fail with a transport or hardware error.
#[async_trait]
pub trait DeskBackend: Send + Sync {
    async fn check_connection(&self) -> Result<ConnectionStatus>;
    async fn get_height(&self) -> Result<i32>;
    async fn move_by_step(&self, up: bool) -> Result<()>;
    async fn move_to_height(&self, target_mm: i32) -> Result<()>;
    fn subscribe_events(&self) -> broadcast::Receiver<DeskEvent>;
}

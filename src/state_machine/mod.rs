// Lifecycle state machine for orchestration units
//
// The host workflow engine owns scheduling and durability; these types give the
// unit its own explicit lifecycle instead of borrowing the host's state names.

pub mod events;
pub mod states;
pub mod unit_state_machine;

pub use events::UnitEvent;
pub use states::UnitState;
pub use unit_state_machine::UnitStateMachine;

mod bus;
mod coordinator;
mod debounce;

pub use bus::{InputBus, InputSubscription};
pub use coordinator::{
    Dispatch, DispatchTrigger, InteractionCoordinator, InteractionStats, MountContext, Occupancy,
    ZoneHandler, LOGIN_ROUTE,
};

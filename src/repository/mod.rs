pub mod favorites;
pub mod floors;
pub mod payments;
pub mod renthouses;
pub mod rooms;
pub mod users;

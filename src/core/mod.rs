pub mod flight_data;
pub mod tracker;

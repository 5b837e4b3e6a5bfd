pub mod heartbeat;
pub mod home_assistant;
pub mod sunpower;
pub mod upstream;

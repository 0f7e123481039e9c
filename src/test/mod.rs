mod config;
mod sim_time;

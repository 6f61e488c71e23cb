mod client;
mod service;

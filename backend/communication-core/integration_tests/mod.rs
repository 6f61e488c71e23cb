mod helpers;
mod host;
mod wire;

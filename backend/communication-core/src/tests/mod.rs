mod channel;
mod proxy;
mod support;

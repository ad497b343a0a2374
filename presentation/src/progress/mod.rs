//! Live progress rendering through the session observer port

pub mod observer;

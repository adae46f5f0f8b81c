//! Map tool application: directory setup, the frame clock, scripted input and
//! the headless frame loop.

pub mod app;
pub mod frame_clock;
pub mod platform;
pub mod script;

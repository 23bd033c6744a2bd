mod app;
mod audio;
mod catalog;
mod config;
mod consent;
mod download;
mod http;
mod logging;
mod mpris;
mod playback;
mod runtime;
mod session;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}

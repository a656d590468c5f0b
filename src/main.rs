mod catalog;
mod config;
mod error;
mod logging;
mod mpris;
mod output;
mod playback;
mod runtime;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}

mod recorder;
mod recording_format;
mod session_time;
mod snapshot_builder;
mod transfer_store;

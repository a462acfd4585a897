pub mod poller;
pub mod scheduler;
#[cfg(test)]
pub mod testing;
pub mod watermark;

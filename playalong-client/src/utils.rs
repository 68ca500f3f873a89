#[cfg(test)]
pub mod test_backend;
pub mod time_source;

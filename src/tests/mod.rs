#[cfg(test)]
pub mod fakes;

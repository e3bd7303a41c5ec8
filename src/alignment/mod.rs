pub mod report;
pub mod scoring;
pub mod segment;
mod selection;
pub mod word;
#[cfg(test)]
mod tests;

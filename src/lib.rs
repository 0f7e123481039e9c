pub mod net;
pub mod proto;
pub mod sim;
pub mod viz;

#[cfg(test)]
mod test;

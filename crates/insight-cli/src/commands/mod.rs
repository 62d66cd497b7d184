pub mod descriptor;
pub mod lookup;
pub mod parse;

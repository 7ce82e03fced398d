pub mod kumpul;
pub mod logic;
pub mod run;
pub mod ui;

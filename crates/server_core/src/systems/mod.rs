pub mod slime_ai;

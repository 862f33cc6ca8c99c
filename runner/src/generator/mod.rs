pub mod swath;

pub mod braille_graph;
pub mod gauge;

pub(crate) mod color_matrix;

use nalgebra::DMatrix;
use ndarray::ArrayView2;

/// Clone an ndarray view into a nalgebra matrix.
///
/// `DMatrix::from_vec` fills column-major, so the row-major ndarray data is
/// loaded transposed and flipped back.
pub fn clone_to_dmatrix(view: ArrayView2<'_, f64>) -> DMatrix<f64> {
    let elements = view.iter().cloned().collect::<Vec<f64>>();
    DMatrix::from_vec(view.ncols(), view.nrows(), elements).transpose()
}

use crate::matrix::IntMatrix;

/// Builds the `n x n` negacyclic multiplication matrix of `coefficients`.
pub(super) fn multiplication_matrix(coefficients: &[i64]) -> IntMatrix {
    let n = coefficients.len();
    let mut matrix = IntMatrix::zeros(n, n);
    for col in 0..n {
        for row in 0..n {
            let value = if row >= col {
                coefficients[row - col]
            } else {
                -coefficients[row + n - col]
            };
            matrix.set(row, col, value);
        }
    }
    matrix
}

#![no_main]

use lattice_attack::{IntMatrix, RingParams, ScanConfig, Scanner};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // n = 2, k = 1 gives a 5-dimensional primal basis
    let params = RingParams::new(2, 1, 17, 1).expect("valid parameters");
    let dim = params.lattice_dim();
    if data.len() < 1 + dim * dim {
        return;
    }

    let rows: Vec<Vec<i64>> = data[1..1 + dim * dim]
        .chunks(dim)
        .map(|row| row.iter().map(|&b| i64::from(b as i8)).collect())
        .collect();
    let basis = IntMatrix::from_rows(rows).expect("rows are square");

    let window = usize::from(data[0] % 8);
    let report = Scanner::new(params, ScanConfig::default().with_window(window))
        .scan(&basis)
        .expect("basis has the primal dimension");

    // the window is never empty and rows come out in ascending norm order
    assert!(!report.rows().is_empty());
    assert!(report.rows().windows(2).all(|w| w[0].norm_squared <= w[1].norm_squared));
});

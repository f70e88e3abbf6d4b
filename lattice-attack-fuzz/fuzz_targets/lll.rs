#![no_main]

use lattice_attack::{
    IntMatrix, LllConfig, LllError, LllReducer,
    lll::{DEFAULT_DELTA, check_reduced},
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // first byte picks the dimension, the rest fills the basis with small signed entries
    let Some((&first, entries)) = data.split_first() else {
        return;
    };
    let dim = 2 + usize::from(first % 7);
    if entries.len() < dim * dim {
        return;
    }

    let rows: Vec<Vec<i64>> = entries[..dim * dim]
        .chunks(dim)
        .map(|row| row.iter().map(|&b| i64::from(b as i8)).collect())
        .collect();
    let Ok(basis) = IntMatrix::from_rows(rows) else {
        return;
    };

    let config = LllConfig::default().with_max_iterations(Some(100_000));
    let mut reducer = match LllReducer::new(basis, config) {
        Ok(reducer) => reducer,
        Err(LllError::DegenerateBasis { .. }) => return,
        Err(err) => panic!("unexpected error for a square basis: {err}"),
    };

    match reducer.reduce() {
        Ok(_) => {
            check_reduced(reducer.basis(), DEFAULT_DELTA, 1e-6)
                .expect("reducer output must be LLL-reduced");
        },
        // rank deficiency can surface only after rows are combined
        Err(LllError::DegenerateBasis { .. }) => {},
        Err(err) => panic!("reduction failed: {err}"),
    }
});

//! # Decoder
//!
//! Projects a binary solution back onto asset identifiers.

use crate::error::QuboError;
use crate::qubo::form::check_binary;

/// Split `tickers` into `(selected, not_selected)` by the matching bit of `x`.
///
/// Order within each side follows the input order.
pub fn decode<S: AsRef<str>>(
  tickers: &[S],
  x: &[u8],
) -> Result<(Vec<String>, Vec<String>), QuboError> {
  if tickers.len() != x.len() {
    return Err(QuboError::dimension("solution vector", tickers.len(), x.len()));
  }
  check_binary(x)?;

  let mut selected = Vec::new();
  let mut not_selected = Vec::new();
  for (ticker, &bit) in tickers.iter().zip(x) {
    if bit == 1 {
      selected.push(ticker.as_ref().to_string());
    } else {
      not_selected.push(ticker.as_ref().to_string());
    }
  }

  Ok((selected, not_selected))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn partitions_in_input_order() {
    let tickers = ["AAPL", "MSFT", "GOOGL", "AMZN", "JPM"];
    let (selected, not_selected) = decode(&tickers, &[1, 0, 1, 0, 0]).unwrap();

    assert_eq!(selected, vec!["AAPL", "GOOGL"]);
    assert_eq!(not_selected, vec!["MSFT", "AMZN", "JPM"]);
  }

  #[test]
  fn demo_solution_decodes_to_googl() {
    let tickers: Vec<String> = ["AAPL", "MSFT", "GOOGL", "AMZN", "JPM"]
      .iter()
      .map(|t| t.to_string())
      .collect();
    let (selected, not_selected) = decode(&tickers, &[0, 0, 1, 0, 0]).unwrap();

    assert_eq!(selected, vec!["GOOGL"]);
    assert_eq!(not_selected.len(), 4);
  }

  #[test]
  fn length_mismatch_is_a_dimension_error() {
    let tickers = ["A", "B", "C"];
    assert_eq!(
      decode(&tickers, &[1, 0]),
      Err(QuboError::Dimension {
        context: "solution vector",
        expected: 3,
        actual: 2,
      })
    );
  }

  #[test]
  fn non_binary_entries_are_rejected() {
    let tickers = ["A", "B"];
    assert_eq!(
      decode(&tickers, &[1, 7]),
      Err(QuboError::NonBinary { index: 1, value: 7 })
    );
  }

  #[test]
  fn empty_inputs_decode_to_empty_sides() {
    let tickers: [&str; 0] = [];
    let (selected, not_selected) = decode(&tickers, &[]).unwrap();
    assert!(selected.is_empty());
    assert!(not_selected.is_empty());
  }
}

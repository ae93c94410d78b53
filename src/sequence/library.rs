use std::collections::HashMap;

/// Numbered table of unique rows, as used for the event and shape sections
/// of a Pulseq file. IDs start at 1; 0 means "no event" in the block table.
#[derive(Default)]
pub struct Library {
    ids: HashMap<Vec<u64>, usize>,
    rows: Vec<Vec<f64>>,
}

impl Library {
    /// ID of an identical row if one exists, otherwise the ID of the newly
    /// inserted row. Rows are compared bit by bit.
    pub fn find_or_insert(&mut self, row: Vec<f64>) -> usize {
        let key: Vec<u64> = row.iter().map(|x| x.to_bits()).collect();
        if let Some(&id) = self.ids.get(&key) {
            return id;
        }
        self.rows.push(row);
        let id = self.rows.len();
        self.ids.insert(key, id);
        id
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &[f64])> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| (i + 1, row.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn identical_rows_share_an_id() {
        let mut lib = Library::default();
        check!(lib.find_or_insert(vec![1.0, 2.0]) == 1);
        check!(lib.find_or_insert(vec![1.0, 3.0]) == 2);
        check!(lib.find_or_insert(vec![1.0, 2.0]) == 1);
        check!(lib.iter().count() == 2);
        check!(lib.iter().last() == Some((2, [1.0, 3.0].as_slice())));
    }
}

use crate::dto::{BirdDto, SightingDto};

pub(crate) const BIRD_COLUMNS: [&str; 5] = ["ID", "Name", "Color", "Weight", "Height"];
pub(crate) const SIGHTING_COLUMNS: [&str; 4] = ["ID", "Bird", "Location", "Date-Time"];

const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Text shown in a bird table cell; unknown columns render as `N/A`.
pub(crate) fn bird_cell(bird: &BirdDto, column: usize) -> String {
    match column {
        0 => bird.id.to_string(),
        1 => bird.name.clone(),
        2 => bird.color.clone(),
        3 => bird.weight.to_string(),
        4 => bird.height.to_string(),
        _ => "N/A".to_string(),
    }
}

/// Text shown in a sighting table cell; the bird column shows its name.
pub(crate) fn sighting_cell(sighting: &SightingDto, column: usize) -> String {
    match column {
        0 => sighting.id.to_string(),
        1 => sighting.bird.name.clone(),
        2 => sighting.location.clone(),
        3 => sighting.date_time.format(DATE_TIME_FORMAT).to_string(),
        _ => "N/A".to_string(),
    }
}

pub(crate) fn bird_cells(bird: &BirdDto) -> Vec<String> {
    (0..BIRD_COLUMNS.len())
        .map(|column| bird_cell(bird, column))
        .collect()
}

pub(crate) fn sighting_cells(sighting: &SightingDto) -> Vec<String> {
    (0..SIGHTING_COLUMNS.len())
        .map(|column| sighting_cell(sighting, column))
        .collect()
}

/// Rows that can be re-selected by id after a reload.
pub(crate) trait RowId {
    fn row_id(&self) -> i64;
}

impl RowId for BirdDto {
    fn row_id(&self) -> i64 {
        self.id
    }
}

impl RowId for SightingDto {
    fn row_id(&self) -> i64 {
        self.id
    }
}

/// Rows of a table plus the highlighted index.
pub(crate) struct TableRows<T> {
    rows: Vec<T>,
    selected: usize,
}

impl<T> Default for TableRows<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            selected: 0,
        }
    }
}

impl<T: RowId> TableRows<T> {
    pub(crate) fn rows(&self) -> &[T] {
        &self.rows
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub(crate) fn current(&self) -> Option<&T> {
        self.rows.get(self.selected)
    }

    pub(crate) fn current_id(&self) -> Option<i64> {
        self.current().map(RowId::row_id)
    }

    pub(crate) fn selected_index(&self) -> Option<usize> {
        (!self.rows.is_empty()).then_some(self.selected)
    }

    /// Swap in freshly loaded rows, keeping the highlight on `focus` when it
    /// is still present and clamping it otherwise.
    pub(crate) fn replace(&mut self, rows: Vec<T>, focus: Option<i64>) {
        self.rows = rows;
        if let Some(id) = focus {
            if self.select_id(id) {
                return;
            }
        }
        self.ensure_in_bounds();
    }

    pub(crate) fn clear(&mut self) {
        self.rows.clear();
        self.selected = 0;
    }

    pub(crate) fn select_id(&mut self, id: i64) -> bool {
        match self.rows.iter().position(|row| row.row_id() == id) {
            Some(index) => {
                self.selected = index;
                true
            }
            None => false,
        }
    }

    /// Move the highlight, reporting whether a different row is now selected.
    pub(crate) fn move_selection(&mut self, offset: isize) -> bool {
        if self.rows.is_empty() {
            return false;
        }
        let len = self.rows.len() as isize;
        let new = (self.selected as isize + offset).clamp(0, len - 1) as usize;
        let changed = new != self.selected;
        self.selected = new;
        changed
    }

    pub(crate) fn select_first(&mut self) -> bool {
        let changed = self.selected != 0;
        self.selected = 0;
        changed && !self.rows.is_empty()
    }

    pub(crate) fn select_last(&mut self) -> bool {
        if self.rows.is_empty() {
            return false;
        }
        let last = self.rows.len() - 1;
        let changed = self.selected != last;
        self.selected = last;
        changed
    }

    fn ensure_in_bounds(&mut self) {
        if self.rows.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.rows.len() {
            self.selected = self.rows.len() - 1;
        }
    }
}

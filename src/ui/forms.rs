use anyhow::{anyhow, Result};
use chrono::NaiveDateTime;
use ratatui::text::Line;

use crate::dto::{BirdDto, SightingDto};
use crate::models::{NewBird, NewSighting};
use crate::query::BirdQuery;

use super::helpers::field_line;

/// Input state for the "Add Bird" panel and the edit popup.
#[derive(Default, Clone)]
pub(crate) struct BirdForm {
    pub(crate) name: String,
    pub(crate) color: String,
    pub(crate) weight: String,
    pub(crate) height: String,
    pub(crate) active: BirdField,
    pub(crate) error: Option<String>,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub(crate) enum BirdField {
    #[default]
    Name,
    Color,
    Weight,
    Height,
}

impl BirdField {
    pub(crate) const ALL: [BirdField; 4] = [
        BirdField::Name,
        BirdField::Color,
        BirdField::Weight,
        BirdField::Height,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            BirdField::Name => "Name",
            BirdField::Color => "Color",
            BirdField::Weight => "Weight",
            BirdField::Height => "Height",
        }
    }

    fn next(self) -> Self {
        match self {
            BirdField::Name => BirdField::Color,
            BirdField::Color => BirdField::Weight,
            BirdField::Weight => BirdField::Height,
            BirdField::Height => BirdField::Name,
        }
    }

    fn previous(self) -> Self {
        match self {
            BirdField::Name => BirdField::Height,
            BirdField::Color => BirdField::Name,
            BirdField::Weight => BirdField::Color,
            BirdField::Height => BirdField::Weight,
        }
    }
}

impl BirdForm {
    /// Populate the form from an existing bird when editing.
    pub(crate) fn from_bird(bird: &BirdDto) -> Self {
        Self {
            name: bird.name.clone(),
            color: bird.color.clone(),
            weight: bird.weight.to_string(),
            height: bird.height.to_string(),
            active: BirdField::Name,
            error: None,
        }
    }

    pub(crate) fn next_field(&mut self) {
        self.active = self.active.next();
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = self.active.previous();
    }

    fn value_mut(&mut self, field: BirdField) -> &mut String {
        match field {
            BirdField::Name => &mut self.name,
            BirdField::Color => &mut self.color,
            BirdField::Weight => &mut self.weight,
            BirdField::Height => &mut self.height,
        }
    }

    pub(crate) fn value(&self, field: BirdField) -> &str {
        match field {
            BirdField::Name => &self.name,
            BirdField::Color => &self.color,
            BirdField::Weight => &self.weight,
            BirdField::Height => &self.height,
        }
    }

    /// Append a character to the active field. Measurements only accept
    /// digits and a decimal point.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        let accepted = match self.active {
            BirdField::Weight | BirdField::Height => ch.is_ascii_digit() || ch == '.',
            BirdField::Name | BirdField::Color => !ch.is_control(),
        };
        if accepted {
            let field = self.active;
            self.value_mut(field).push(ch);
        }
        accepted
    }

    pub(crate) fn backspace(&mut self) {
        let field = self.active;
        self.value_mut(field).pop();
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }

    /// Validate the inputs and return a bird ready to be sent to the service.
    pub(crate) fn parse_inputs(&self) -> Result<NewBird> {
        let name = required(&self.name, "Name")?;
        let color = required(&self.color, "Color")?;
        let weight = positive_number(&self.weight, "Weight")?;
        let height = positive_number(&self.height, "Height")?;
        Ok(NewBird {
            name,
            color,
            weight,
            height,
        })
    }

    pub(crate) fn build_line(&self, field: BirdField, is_focused: bool) -> Line<'static> {
        field_line(
            field.label(),
            self.value(field),
            "<required>",
            is_focused && self.active == field,
        )
    }

    pub(crate) fn value_len(&self, field: BirdField) -> usize {
        self.value(field).chars().count()
    }
}

/// Input state for the "Add Sighting" panel. The timestamp is taken when the
/// form is submitted.
#[derive(Default, Clone)]
pub(crate) struct SightingForm {
    pub(crate) bird_id: String,
    pub(crate) location: String,
    pub(crate) active: SightingField,
    pub(crate) error: Option<String>,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub(crate) enum SightingField {
    #[default]
    BirdId,
    Location,
}

impl SightingField {
    pub(crate) const ALL: [SightingField; 2] = [SightingField::BirdId, SightingField::Location];

    pub(crate) fn label(self) -> &'static str {
        match self {
            SightingField::BirdId => "Bird ID",
            SightingField::Location => "Location",
        }
    }
}

impl SightingForm {
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            SightingField::BirdId => SightingField::Location,
            SightingField::Location => SightingField::BirdId,
        };
    }

    pub(crate) fn value(&self, field: SightingField) -> &str {
        match field {
            SightingField::BirdId => &self.bird_id,
            SightingField::Location => &self.location,
        }
    }

    /// Fill in the bird id from the table selection unless the user already
    /// typed one.
    pub(crate) fn suggest_bird(&mut self, bird_id: i64) {
        if self.bird_id.trim().is_empty() {
            self.bird_id = bird_id.to_string();
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        match self.active {
            SightingField::BirdId => {
                if ch.is_ascii_digit() {
                    self.bird_id.push(ch);
                    true
                } else {
                    false
                }
            }
            SightingField::Location => {
                if !ch.is_control() {
                    self.location.push(ch);
                    true
                } else {
                    false
                }
            }
        }
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            SightingField::BirdId => {
                self.bird_id.pop();
            }
            SightingField::Location => {
                self.location.pop();
            }
        }
    }

    /// Keep the bird id so several sightings of the same bird can be logged
    /// in a row.
    pub(crate) fn reset_location(&mut self) {
        self.location.clear();
        self.active = SightingField::Location;
        self.error = None;
    }

    pub(crate) fn parse_inputs(&self, now: NaiveDateTime) -> Result<NewSighting> {
        let raw_id = required(&self.bird_id, "Bird ID")?;
        let bird_id = raw_id
            .parse::<i64>()
            .map_err(|_| anyhow!("Bird ID must be an integer."))?;
        let location = required(&self.location, "Location")?;
        Ok(NewSighting {
            bird_id,
            location,
            date_time: now,
        })
    }

    pub(crate) fn build_line(&self, field: SightingField, is_focused: bool) -> Line<'static> {
        field_line(
            field.label(),
            self.value(field),
            "<required>",
            is_focused && self.active == field,
        )
    }

    pub(crate) fn value_len(&self, field: SightingField) -> usize {
        self.value(field).chars().count()
    }
}

/// Popup state for the bird name/color filter.
#[derive(Default, Clone)]
pub(crate) struct FilterForm {
    pub(crate) name: String,
    pub(crate) color: String,
    pub(crate) editing_color: bool,
}

impl FilterForm {
    pub(crate) fn from_query(query: &BirdQuery) -> Self {
        Self {
            name: query.name.clone().unwrap_or_default(),
            color: query.color.clone().unwrap_or_default(),
            editing_color: false,
        }
    }

    pub(crate) fn toggle_field(&mut self) {
        self.editing_color = !self.editing_color;
    }

    pub(crate) fn push_char(&mut self, ch: char) {
        if ch.is_control() {
            return;
        }
        if self.editing_color {
            self.color.push(ch);
        } else {
            self.name.push(ch);
        }
    }

    pub(crate) fn backspace(&mut self) {
        if self.editing_color {
            self.color.pop();
        } else {
            self.name.pop();
        }
    }

    /// Blank inputs mean "no filter" for that attribute.
    pub(crate) fn to_query(&self) -> BirdQuery {
        BirdQuery {
            name: non_blank(&self.name),
            color: non_blank(&self.color),
        }
    }

    pub(crate) fn lines(&self) -> Vec<Line<'static>> {
        vec![
            field_line("Name", &self.name, "<any>", !self.editing_color),
            field_line("Color", &self.color, "<any>", self.editing_color),
        ]
    }

    pub(crate) fn cursor(&self) -> (&'static str, usize, u16) {
        if self.editing_color {
            ("Color", self.color.chars().count(), 1)
        } else {
            ("Name", self.name.chars().count(), 0)
        }
    }
}

/// The row a delete confirmation refers to.
#[derive(Clone)]
pub(crate) enum ConfirmDelete {
    Bird(BirdDto),
    Sighting(SightingDto),
}

impl ConfirmDelete {
    pub(crate) fn prompt(&self) -> String {
        match self {
            ConfirmDelete::Bird(bird) => {
                format!("Delete bird #{} \"{}\" ({})?", bird.id, bird.name, bird.color)
            }
            ConfirmDelete::Sighting(sighting) => format!(
                "Delete sighting #{} of {} at {}?",
                sighting.id, sighting.bird.name, sighting.location
            ),
        }
    }
}

fn required(raw: &str, field: &str) -> Result<String> {
    let value = raw.trim();
    if value.is_empty() {
        Err(anyhow!("{field} is required."))
    } else {
        Ok(value.to_string())
    }
}

fn positive_number(raw: &str, field: &str) -> Result<f64> {
    let value = required(raw, field)?;
    let number = value
        .parse::<f64>()
        .map_err(|_| anyhow!("{field} must be a number."))?;
    if number.is_finite() && number > 0.0 {
        Ok(number)
    } else {
        Err(anyhow!("{field} must be greater than zero."))
    }
}

fn non_blank(raw: &str) -> Option<String> {
    let value = raw.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn typed(form: &mut BirdForm, text: &str) {
        for ch in text.chars() {
            form.push_char(ch);
        }
    }

    #[test]
    fn bird_form_parses_trimmed_values() {
        let mut form = BirdForm::default();
        typed(&mut form, " Sparrow ");
        form.next_field();
        typed(&mut form, "Brown");
        form.next_field();
        typed(&mut form, "0.03");
        form.next_field();
        typed(&mut form, "15");

        let bird = form.parse_inputs().unwrap();
        assert_eq!(bird.name, "Sparrow");
        assert_eq!(bird.color, "Brown");
        assert_eq!(bird.weight, 0.03);
        assert_eq!(bird.height, 15.0);
    }

    #[test]
    fn measurement_fields_reject_letters() {
        let mut form = BirdForm {
            active: BirdField::Weight,
            ..BirdForm::default()
        };
        assert!(!form.push_char('x'));
        assert!(form.push_char('1'));
        assert_eq!(form.weight, "1");
    }

    #[test]
    fn bird_form_requires_positive_measurements() {
        let form = BirdForm {
            name: "Robin".into(),
            color: "Red".into(),
            weight: "0".into(),
            height: "20".into(),
            ..BirdForm::default()
        };
        let err = form.parse_inputs().unwrap_err();
        assert_eq!(err.to_string(), "Weight must be greater than zero.");

        let form = BirdForm {
            weight: "1..2".into(),
            ..form
        };
        assert_eq!(
            form.parse_inputs().unwrap_err().to_string(),
            "Weight must be a number."
        );
    }

    #[test]
    fn bird_form_requires_name() {
        let form = BirdForm {
            color: "Red".into(),
            weight: "1".into(),
            height: "1".into(),
            ..BirdForm::default()
        };
        assert_eq!(
            form.parse_inputs().unwrap_err().to_string(),
            "Name is required."
        );
    }

    #[test]
    fn field_focus_wraps_around() {
        let mut form = BirdForm::default();
        form.previous_field();
        assert_eq!(form.active, BirdField::Height);
        form.next_field();
        assert_eq!(form.active, BirdField::Name);
    }

    #[test]
    fn sighting_form_stamps_submission_time() {
        let now = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let mut form = SightingForm::default();
        form.suggest_bird(4);
        form.toggle_field();
        for ch in "Backyard".chars() {
            form.push_char(ch);
        }

        let sighting = form.parse_inputs(now).unwrap();
        assert_eq!(sighting.bird_id, 4);
        assert_eq!(sighting.location, "Backyard");
        assert_eq!(sighting.date_time, now);

        form.reset_location();
        assert_eq!(form.bird_id, "4");
        assert!(form.location.is_empty());
    }

    #[test]
    fn suggestion_does_not_overwrite_typed_id() {
        let mut form = SightingForm {
            bird_id: "7".into(),
            ..SightingForm::default()
        };
        form.suggest_bird(2);
        assert_eq!(form.bird_id, "7");
    }

    #[test]
    fn sighting_form_requires_location() {
        let form = SightingForm {
            bird_id: "1".into(),
            ..SightingForm::default()
        };
        let now = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(
            form.parse_inputs(now).unwrap_err().to_string(),
            "Location is required."
        );
    }

    #[test]
    fn blank_filter_fields_are_omitted() {
        let form = FilterForm {
            name: "  ".into(),
            color: "Red".into(),
            editing_color: false,
        };
        let query = form.to_query();
        assert_eq!(query.name, None);
        assert_eq!(query.color.as_deref(), Some("Red"));
    }
}

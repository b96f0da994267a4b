//! Time window entry: "From [min] to [max] Apply"

use egui::{DragValue, Ui};

/// Editable `[min, max]` on the relative time axis
pub struct TimeRangeInput<'a> {
    range: &'a mut [f64; 2],
    limit: f64,
    speed: f64,
}

impl<'a> TimeRangeInput<'a> {
    pub fn new(range: &'a mut [f64; 2], limit: f64) -> Self {
        Self {
            range,
            limit: limit.max(0.0),
            speed: 0.1,
        }
    }

    /// Set the drag speed for value inputs
    pub fn speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    /// Show the widget; returns true when Apply was clicked
    pub fn show(self, ui: &mut Ui) -> bool {
        ui.horizontal(|ui| {
            ui.label("From");
            ui.add(
                DragValue::new(&mut self.range[0])
                    .speed(self.speed)
                    .range(0.0..=self.limit),
            );
            ui.label("to");
            ui.add(
                DragValue::new(&mut self.range[1])
                    .speed(self.speed)
                    .range(0.0..=self.limit),
            );
            ui.button("Apply").clicked()
        })
        .inner
    }
}

//! Presentation views of a trace: highlighted source text per step.

use crate::stepper::{Outcome, Trace};
use serde::Serialize;
use smallstep_types::{codify, codify_with_marker, Marker, MarkerClass, Rendered};

/// One frame shown to a learner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepView {
    pub code: String,
    pub markers: Vec<Marker>,
    pub explanation: String,
}

impl StepView {
    fn from_rendered(rendered: Rendered, explanation: String) -> Self {
        Self {
            code: rendered.text,
            markers: rendered.marker.into_iter().collect(),
            explanation,
        }
    }
}

impl Trace {
    /// Before/after frames for every reduction, then one closing frame.
    ///
    /// The "before" frame marks the redex in the old tree; the "after" frame
    /// marks its result in the new tree. Dropped statements have nothing to
    /// mark after the step.
    pub fn views(&self) -> Vec<StepView> {
        let mut views = Vec::with_capacity(self.steps.len() * 2);

        for pair in self.steps.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            let Some(redex) = &next.redex else {
                continue;
            };
            let explanation = redex.explain();
            views.push(StepView::from_rendered(
                codify_with_marker(&prev.term, &redex.pre, MarkerClass::Before),
                explanation.clone(),
            ));
            let after = match &redex.post {
                Some(post) => codify_with_marker(&next.term, post, MarkerClass::After),
                None => Rendered {
                    text: codify(&next.term),
                    marker: None,
                },
            };
            views.push(StepView::from_rendered(after, explanation));
        }

        if let Some(last) = self.final_term() {
            let explanation = match &self.outcome {
                Outcome::Value(_) => "Evaluation complete",
                Outcome::Stuck => "Evaluation stuck",
                Outcome::Truncated => "Step limit reached",
            };
            views.push(StepView {
                code: codify(last),
                markers: Vec::new(),
                explanation: explanation.to_string(),
            });
        }
        views
    }
}

#[cfg(test)]
mod tests {
    use crate::stepper::Stepper;
    use smallstep_types::{BinaryOp, LogicalOp, Span, Term};

    #[test]
    fn single_reduction_frames() {
        let term = Term::expression_statement(Term::binary(
            BinaryOp::Add,
            Term::number(1.0),
            Term::binary(BinaryOp::Mul, Term::number(2.0), Term::number(3.0)),
        ));
        let trace = Stepper::new().run(term).unwrap();
        let views = trace.views();
        // Two reductions, two frames each, plus the closing frame.
        assert_eq!(views.len(), 5);

        assert_eq!(views[0].code, "1 + 2 * 3;");
        assert_eq!(views[0].markers[0].span, Span::new(4, 9));
        assert_eq!(views[0].explanation, "Binary expression 2 * 3 evaluated");
        assert_eq!(views[1].code, "1 + 6;");
        assert_eq!(views[1].markers[0].span, Span::new(4, 5));
        assert_eq!(views[1].markers[0].class, smallstep_types::MarkerClass::After);

        assert_eq!(views[4].code, "7;");
        assert!(views[4].markers.is_empty());
        assert_eq!(views[4].explanation, "Evaluation complete");
    }

    #[test]
    fn removal_has_no_after_marker() {
        let program = Term::program(vec![
            Term::expression_statement(Term::number(1.0)),
            Term::expression_statement(Term::number(2.0)),
        ]);
        let views = Stepper::new().run(program).unwrap().views();
        assert_eq!(views.len(), 3);
        assert_eq!(views[0].code, "1;\n2;");
        assert_eq!(views[0].markers[0].span, Span::new(0, 2));
        assert_eq!(views[0].explanation, "1; finished evaluating");
        assert_eq!(views[1].code, "2;");
        assert!(views[1].markers.is_empty());
    }

    #[test]
    fn after_marker_tracks_the_reduced_occurrence() {
        // const b = false; b || (true && b);
        let program = Term::program(vec![
            Term::constant("b", Term::boolean(false)),
            Term::expression_statement(Term::logical(
                LogicalOp::Or,
                Term::identifier("b"),
                Term::logical(LogicalOp::And, Term::boolean(true), Term::identifier("b")),
            )),
        ]);
        let views = Stepper::new().run(program).unwrap().views();
        let and_step = views
            .iter()
            .position(|v| v.explanation.starts_with("AND operation evaluated"))
            .unwrap();

        let before = &views[and_step];
        assert_eq!(before.code, "false || true && false;");
        assert_eq!(before.markers[0].span, Span::new(9, 22));

        let after = &views[and_step + 1];
        assert_eq!(after.code, "false || false;");
        assert_eq!(after.markers[0].span, Span::new(9, 14));
    }

    #[test]
    fn stuck_closing_frame() {
        let term = Term::expression_statement(Term::binary(
            BinaryOp::Div,
            Term::number(5.0),
            Term::number(0.0),
        ));
        let views = Stepper::new().run(term).unwrap().views();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].code, "5 / 0;");
        assert_eq!(views[0].explanation, "Evaluation stuck");
    }

    #[test]
    fn view_json_shape() {
        let term = Term::binary(BinaryOp::Sub, Term::number(3.0), Term::number(1.0));
        let views = Stepper::new().run(term).unwrap().views();
        let json = serde_json::to_value(&views[0]).unwrap();
        assert_eq!(json["code"], "3 - 1");
        assert_eq!(json["markers"][0]["start"], 0);
        assert_eq!(json["markers"][0]["end"], 5);
        assert_eq!(json["markers"][0]["class"], "beforeMarker");
    }
}

//! Field schemas for the four toolkit forms.
//!
//! This is the single source of truth for keys, labels, sections and
//! default titles. The store, the view and the renderer all read from here.

use crate::form::{FieldDescriptor, FieldOption, FormId, FormSchema, FormStyle, Section};

const EXPERIMENT_TYPES: &[FieldOption] = &[
    FieldOption { value: "ab", label: "A/B" },
    FieldOption { value: "bandit", label: "Multi-armed Bandit" },
    FieldOption { value: "factorial", label: "Factorial" },
    FieldOption { value: "sequential", label: "Sequential" },
    FieldOption { value: "adaptive", label: "Adaptive Personalisation" },
    FieldOption { value: "hybrid", label: "Hybrid Lab–Field" },
    FieldOption { value: "simulation", label: "Simulation" },
];

const RANDOMISATION_UNITS: &[FieldOption] = &[
    FieldOption { value: "user", label: "User" },
    FieldOption { value: "session", label: "Session" },
    FieldOption { value: "device", label: "Device" },
];

const SUMMARY_DECISIONS: &[FieldOption] = &[
    FieldOption { value: "launch", label: "Launch" },
    FieldOption { value: "iterate", label: "Iterate" },
    FieldOption { value: "retire", label: "Retire" },
    FieldOption { value: "retest", label: "Re-test" },
];

const GONO_DECISIONS: &[FieldOption] = &[
    FieldOption { value: "go", label: "GO - Launch the experiment results" },
    FieldOption { value: "no-go", label: "NO-GO - Do not launch" },
];

/// Key of the go/no-go decision slot.
pub const GONO_DECISION_KEY: &str = "final_decision";

static BRIEF: FormSchema = FormSchema {
    id: FormId::Brief,
    title: "Blank Experiment Brief",
    style: FormStyle::FreeText,
    sections: &[Section {
        title: "",
        fields: &[
            FieldDescriptor::text("title", "Experiment Title"),
            FieldDescriptor::text("owner", "Owner"),
            FieldDescriptor::text("date", "Date"),
            FieldDescriptor::text("problem", "Problem Statement"),
            FieldDescriptor::text("hypothesis", "Hypothesis"),
            FieldDescriptor::text("primary_metric", "Primary Metric"),
            FieldDescriptor::text("guardrails", "Guardrails"),
            FieldDescriptor::choice("experiment_type", "Experiment Type", EXPERIMENT_TYPES),
            FieldDescriptor::choice("randomisation_unit", "Randomisation Unit", RANDOMISATION_UNITS),
            FieldDescriptor::text("traffic_plan", "Traffic Plan"),
            FieldDescriptor::text("baseline_mde", "Baseline & MDE"),
            FieldDescriptor::text("sample_size", "Sample Size"),
            FieldDescriptor::text("variants", "Variants"),
            FieldDescriptor::text("risks", "Risks & Mitigations"),
            FieldDescriptor::text("decision_rule", "Decision Rule"),
        ],
    }],
    decision: None,
};

static CHECKLIST: FormSchema = FormSchema {
    id: FormId::Checklist,
    title: "Master Experiment Checklist",
    style: FormStyle::Checklist,
    sections: &[
        Section {
            title: "Planning & Hypothesis",
            fields: &[
                FieldDescriptor::check("planning_1", "Problem defined in one sentence"),
                FieldDescriptor::check("planning_2", "Hypothesis includes direction + expected impact"),
                FieldDescriptor::check("planning_3", "Minimum Detectable Effect (MDE) calculated"),
                FieldDescriptor::check("planning_4", "Primary metric + definition documented"),
                FieldDescriptor::check("planning_5", "Guardrail metrics listed with rationale"),
                FieldDescriptor::check("planning_6", "Target segments/eligibility rules defined"),
            ],
        },
        Section {
            title: "Design & Setup",
            fields: &[
                FieldDescriptor::check("design_1", "Experiment type selected (A/B, Bandit, Factorial, etc.)"),
                FieldDescriptor::check("design_2", "Traffic allocation plan agreed (with floors if adaptive)"),
                FieldDescriptor::check("design_3", "Variant version control in place"),
                FieldDescriptor::check("design_4", "Randomisation unit + method documented"),
                FieldDescriptor::check("design_5", "Analysis plan pre-registered"),
            ],
        },
        Section {
            title: "Execution",
            fields: &[
                FieldDescriptor::check("execution_1", "Burn-in/baseline period scheduled"),
                FieldDescriptor::check("execution_2", "Interim look schedule set (if sequential)"),
                FieldDescriptor::check("execution_3", "Adaptive tweak rules pre-written"),
                FieldDescriptor::check("execution_4", "Accessibility & brand checks done"),
                FieldDescriptor::check("execution_5", "Event logging validated"),
            ],
        },
        Section {
            title: "Analysis & Decision",
            fields: &[
                FieldDescriptor::check("analysis_1", "Method documented (frequentist/Bayesian)"),
                FieldDescriptor::check("analysis_2", "Stop rule respected (no unscheduled peeks)"),
                FieldDescriptor::check("analysis_3", "Guardrails checked before declaring win"),
                FieldDescriptor::check("analysis_4", "Effect size + CI interpreted"),
                FieldDescriptor::check("analysis_5", "Practical significance assessed"),
            ],
        },
        Section {
            title: "Post-Experiment",
            fields: &[
                FieldDescriptor::check("post_1", "Decision logged (launch/iterate/retire)"),
                FieldDescriptor::check("post_2", "Findings shared in ≤1-page summary"),
                FieldDescriptor::check("post_3", "Data + results stored in registry"),
                FieldDescriptor::check("post_4", "Risk/mitigation notes updated"),
            ],
        },
    ],
    decision: None,
};

static SUMMARY: FormSchema = FormSchema {
    id: FormId::Summary,
    title: "Post-Experiment Summary",
    style: FormStyle::FreeText,
    sections: &[Section {
        title: "",
        fields: &[
            FieldDescriptor::text("title", "Experiment Title"),
            FieldDescriptor::text("owner", "Owner"),
            FieldDescriptor::text("date", "Date"),
            FieldDescriptor::text("result_summary", "Result Summary"),
            FieldDescriptor::text("key_learnings", "Key Learnings"),
            FieldDescriptor::choice("decision", "Decision", SUMMARY_DECISIONS),
            FieldDescriptor::text("next_steps", "Next Steps"),
            FieldDescriptor::text("notes", "Notes for Future"),
        ],
    }],
    decision: None,
};

static GONO: FormSchema = FormSchema {
    id: FormId::Gono,
    title: "Go/No-Go Checklist for AI-Augmented Prototypes",
    style: FormStyle::Checklist,
    sections: &[Section {
        title: "Launch Readiness Checklist",
        fields: &[
            FieldDescriptor::check("gono_1", "Prototype fidelity matches intended test goal"),
            FieldDescriptor::check("gono_2", "AI-generated content reviewed for compliance and tone"),
            FieldDescriptor::check("gono_3", "Accessibility passed (contrast, tab order, screen reader)"),
            FieldDescriptor::check("gono_4", "Brand guidelines met"),
            FieldDescriptor::check("gono_5", "Data privacy rules satisfied"),
            FieldDescriptor::check("gono_6", "Segment sample sizes viable"),
            FieldDescriptor::check("gono_7", "Hypothesis ties back to real research insight"),
        ],
    }],
    decision: Some(FieldDescriptor::choice(
        GONO_DECISION_KEY,
        "Final Decision",
        GONO_DECISIONS,
    )),
};

/// Get the schema for a form.
#[must_use]
pub fn schema_for(form: FormId) -> &'static FormSchema {
    match form {
        FormId::Brief => &BRIEF,
        FormId::Checklist => &CHECKLIST,
        FormId::Summary => &SUMMARY,
        FormId::Gono => &GONO,
    }
}

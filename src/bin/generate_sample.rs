//! Writes a pair of deterministic sample sources (`contract_value.csv` and
//! `savings.csv`, tab-delimited) so the dashboard can be tried without real
//! data.
//!
//! The fixture deliberately includes the awkward cases the pipeline has to
//! tolerate: an unparseable amount, an empty amount, an agency whose savings
//! exceed its contract value, and one unmatched row on each side.

use csv::WriterBuilder;

struct SampleRow {
    agency: &'static str,
    description: &'static str,
    uploaded_on: &'static str,
    link: &'static str,
    value: &'static str,
    saved: &'static str,
}

const ROWS: &[SampleRow] = &[
    SampleRow {
        agency: "Dept. of Transportation",
        description: "Highway telemetry platform",
        uploaded_on: "2024-11-02",
        link: "https://contracts.example.gov/dot/4411",
        value: "$12,400,000",
        saved: "$1,860,000",
    },
    SampleRow {
        agency: "Dept. of Transportation",
        description: "Fleet maintenance consolidation",
        uploaded_on: "2024-12-19",
        link: "https://contracts.example.gov/dot/4637",
        value: "$3,150,000",
        saved: "$945,000",
    },
    SampleRow {
        agency: "General Services Administration",
        description: "Office lease renegotiation",
        uploaded_on: "2024-10-28",
        link: "https://contracts.example.gov/gsa/2210",
        value: "$48,900,000",
        saved: "$7,335,000",
    },
    SampleRow {
        agency: "General Services Administration",
        description: "Shared cloud procurement",
        uploaded_on: "2025-01-14",
        link: "https://contracts.example.gov/gsa/2384",
        value: "$21,000,000",
        saved: "$4,200,000",
    },
    SampleRow {
        agency: "Dept. of Education",
        description: "Student aid call center",
        uploaded_on: "2024-11-30",
        link: "https://contracts.example.gov/ed/880",
        value: "N/A",
        saved: "$610,000",
    },
    SampleRow {
        agency: "Dept. of Education",
        description: "Grant processing software",
        uploaded_on: "2025-02-06",
        link: "https://contracts.example.gov/ed/913",
        value: "$5,750,000",
        saved: "",
    },
    SampleRow {
        agency: "Dept. of Energy",
        description: "Lab equipment early termination",
        uploaded_on: "2025-01-22",
        link: "https://contracts.example.gov/doe/1502",
        value: "$2,300,000",
        saved: "$2,950,000",
    },
    SampleRow {
        agency: "Social Security Administration",
        description: "Records digitization",
        uploaded_on: "2024-12-05",
        link: "https://contracts.example.gov/ssa/664",
        value: "$9,800,000",
        saved: "$1,470,000",
    },
    SampleRow {
        agency: "Small Business Administration",
        description: "Loan servicing portal",
        uploaded_on: "2025-01-09",
        link: "https://contracts.example.gov/sba/341",
        value: "$4,600,000",
        saved: "$690,000",
    },
];

// Rows present in only one source, dropped by the default inner join.
const CONTRACT_ONLY: SampleRow = SampleRow {
    agency: "Dept. of Energy",
    description: "Turbine research support",
    uploaded_on: "2025-02-18",
    link: "https://contracts.example.gov/doe/1549",
    value: "$7,100,000",
    saved: "",
};

const SAVINGS_ONLY: SampleRow = SampleRow {
    agency: "Small Business Administration",
    description: "Regional office IT refresh",
    uploaded_on: "2025-02-21",
    link: "https://contracts.example.gov/sba/377",
    value: "",
    saved: "$380,000",
};

fn main() {
    let contract_path = "contract_value.csv";
    let mut contract = WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(contract_path)
        .expect("Failed to create contract_value.csv");
    contract
        .write_record(["Agency", "Description", "Uploaded on", "Link", "Value"])
        .expect("Failed to write contract header");
    for row in ROWS {
        contract
            .write_record([row.agency, row.description, row.uploaded_on, row.link, row.value])
            .expect("Failed to write contract row");
    }
    let extra = &CONTRACT_ONLY;
    contract
        .write_record([
            extra.agency,
            extra.description,
            extra.uploaded_on,
            extra.link,
            extra.value,
        ])
        .expect("Failed to write contract row");
    contract.flush().expect("Failed to flush contract_value.csv");

    let savings_path = "savings.csv";
    let mut savings = WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(savings_path)
        .expect("Failed to create savings.csv");
    savings
        .write_record(["Agency", "Description", "Uploaded on", "Link", "Saved"])
        .expect("Failed to write savings header");
    for row in ROWS {
        savings
            .write_record([row.agency, row.description, row.uploaded_on, row.link, row.saved])
            .expect("Failed to write savings row");
    }
    let extra = &SAVINGS_ONLY;
    savings
        .write_record([
            extra.agency,
            extra.description,
            extra.uploaded_on,
            extra.link,
            extra.saved,
        ])
        .expect("Failed to write savings row");
    savings.flush().expect("Failed to flush savings.csv");

    println!(
        "Wrote {} contract row(s) to {contract_path} and {} savings row(s) to {savings_path}",
        ROWS.len() + 1,
        ROWS.len() + 1,
    );
}

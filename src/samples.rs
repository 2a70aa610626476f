use crate::settings::CMDSample;

const CONFIG: &str = r#"[logging]
# trace | debug | info | warning | error | off
level_name = "warning"
# stdout | stderr | off | <directory for daily rolling log files>
output = "stderr"

[input]
# Strip leading and trailing whitespace before hashing
trim = false
# Hash empty input instead of rejecting it
allow_empty = true
"#;

pub fn sample(sample_name: CMDSample) -> &'static str {
    match sample_name {
        CMDSample::Config => CONFIG,
    }
}

pub fn print(sample_name: CMDSample) {
    print!("{}", sample(sample_name));
}

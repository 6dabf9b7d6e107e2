use forkview_core::{CameraParameters, Settings};

pub(crate) const DEFAULT_VIEWPORT: [u32; 2] = [800, 600];

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CliArgs {
    pub(crate) headless: bool,
    pub(crate) keys: String,
    pub(crate) size: [u32; 2],
    pub(crate) print: bool,
    pub(crate) help: bool,
    pub(crate) angle_deg: Option<f32>,
    pub(crate) fov_deg: Option<f32>,
    pub(crate) near: Option<f32>,
    pub(crate) far: Option<f32>,
    pub(crate) distance: Option<f32>,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            headless: false,
            keys: String::new(),
            size: DEFAULT_VIEWPORT,
            print: false,
            help: false,
            angle_deg: None,
            fov_deg: None,
            near: None,
            far: None,
            distance: None,
        }
    }
}

impl CliArgs {
    /// Default settings with the command-line overrides applied and clamped.
    pub(crate) fn settings(&self) -> Settings {
        let mut settings = Settings::default();
        if let Some(angle) = self.angle_deg {
            settings.layout.initial_angle_deg = angle;
        }
        let camera = settings.camera;
        settings.camera = CameraParameters::new(
            self.fov_deg.unwrap_or(camera.fov_deg()),
            self.near.unwrap_or(camera.near()),
            self.far.unwrap_or(camera.far()),
        );
        if let Some(distance) = self.distance {
            settings.orbit.distance = distance;
        }
        settings.sanitized()
    }
}

/// Parses the process arguments; the first entry is the program name.
pub(crate) fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut parsed = CliArgs::default();
    let mut iter = args.iter().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--headless" => parsed.headless = true,
            "--print" => parsed.print = true,
            "--help" | "-h" => parsed.help = true,
            "--keys" => {
                parsed.keys = iter
                    .next()
                    .ok_or_else(|| "--keys requires a script".to_string())?
                    .clone();
            }
            "--size" => {
                let value = iter
                    .next()
                    .ok_or_else(|| "--size requires <W>x<H>".to_string())?;
                parsed.size = parse_size(value)?;
            }
            "--angle" => parsed.angle_deg = Some(parse_number(arg, iter.next())?),
            "--fov" => parsed.fov_deg = Some(parse_number(arg, iter.next())?),
            "--near" => parsed.near = Some(parse_number(arg, iter.next())?),
            "--far" => parsed.far = Some(parse_number(arg, iter.next())?),
            "--distance" => parsed.distance = Some(parse_number(arg, iter.next())?),
            other => tracing::warn!("ignoring unknown argument {other}"),
        }
    }

    Ok(parsed)
}

fn parse_number(flag: &str, value: Option<&String>) -> Result<f32, String> {
    let value = value.ok_or_else(|| format!("{flag} requires a value"))?;
    let number: f32 = value
        .parse()
        .map_err(|_| format!("{flag}: '{value}' is not a number"))?;
    if !number.is_finite() {
        return Err(format!("{flag}: '{value}' is not finite"));
    }
    Ok(number)
}

fn parse_size(value: &str) -> Result<[u32; 2], String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("--size: expected <W>x<H>, got '{value}'"))?;
    let parse = |text: &str| {
        text.trim()
            .parse::<u32>()
            .map_err(|_| format!("--size: '{text}' is not a pixel count"))
    };
    let size = [parse(width)?, parse(height)?];
    if size.contains(&0) {
        return Err(format!("--size: '{value}' has a zero dimension"));
    }
    Ok(size)
}

pub(crate) fn print_help() {
    println!(
        "forkview [options]\n\
         \n\
         Initial parameters:\n  \
         --angle <deg>       branch angle, 0..180 (default 45)\n  \
         --fov <deg>         field of view, 10..120 (default 75)\n  \
         --near <v>          near plane, 0.1..10 (default 0.1)\n  \
         --far <v>           far plane, 10..100 (default 50)\n  \
         --distance <v>      orbit camera distance (default 10)\n\
         \n\
         Headless mode:\n  \
         --headless          run without a window\n  \
         --keys <script>     keys to replay: '<' and '>' are the arrows, f/F n/N r/R as typed\n  \
         --size <W>x<H>      viewport size in pixels (default 800x600)\n  \
         --print             print settings and final state as JSON"
    );
}

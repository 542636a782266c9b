use log::info;
use themer::{BlockCursor, Data, LanguageParser, PostParser, Result};

mod templates {
    themer::directory!("templates/");
    themer::file!("standalone/footer.html");
    //language=html
    themer::str!("greeting", r#"
        <p>{lang:About} {Title}</p>
    "#);
}

/// Fills the top-level text values of the data context
fn site_variables(theme: &mut BlockCursor, data: &Data) -> Result<()> {
    theme.render_variables(data.as_map(), true);
    Ok(())
}

fn site_data() -> Result<Data> {
    let mut data = Data::bundled();
    data.load("defaults.yml")?;
    Ok(data)
}

fn main() -> Result<()> {
    env_logger::init();

    let data = site_data()?;
    info!("available locales: {}", data.available_locales().join(", "));

    let mut theme = templates::index::theme().with_data(data);
    info!(
        "index uses {} blocks and {} variables",
        templates::index::BLOCKS.len(),
        templates::index::VARIABLES.len()
    );
    theme.register_parser(LanguageParser::default())?;
    theme.register_parser(PostParser::new())?;
    theme.register_parser(site_variables)?;
    println!("{}", theme.render()?);

    let mut footer = templates::footer::theme().with_data(site_data()?);
    footer.register_parser(site_variables)?;
    println!("{}", footer.render()?);

    let mut french = templates::greeting::theme().with_data(Data::bundled());
    french.register_parser(LanguageParser::new("fr"))?;
    println!("{}", french.render()?);

    Ok(())
}

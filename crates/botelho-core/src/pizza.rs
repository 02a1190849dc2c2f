//! Pizza-quantity calculator behind `/pizza`.
//!
//! The bot asks how many people want pizza with [`PROMPT`] and a numeric
//! reply keyboard; a reply to that prompt is answered with [`reply`].

/// Question sent by `/pizza`. Replies are recognised by this prefix.
pub const PROMPT: &str = "Quantas pessoas vão querer pizza? 🍕";

/// Reply keyboard offered with [`PROMPT`].
pub const KEYBOARD: [[&str; 3]; 4] = [
    ["1", "2", "3"],
    ["4", "5", "6"],
    ["7", "8", "9"],
    ["10", "11", "12"],
];

/// Slices in a regular pizza.
pub const REGULAR_SLICES: f64 = 8.0;

/// Slices in a 60cm "mega" pizza.
pub const MEGA_SLICES: f64 = 22.0;

/// Above this many people the mega pizza is suggested.
const MEGA_THRESHOLD: f64 = 7.0;

/// Above this many people the bot gives up.
const MAX_PEOPLE: f64 = 100.0;

/// Number of pizzas with `slices` slices each needed for `people` people.
///
/// Large pizzas have bigger slices, so two per person are planned instead of
/// three. One extra person is always accounted for.
pub fn pizzas(people: f64, slices: f64) -> f64 {
    let per_person = if slices > 20.0 { 2.0 } else { 3.0 };
    (per_person * (people + 1.0) / slices).ceil()
}

/// Builds the answer to a reply to [`PROMPT`]. The text is Markdown.
#[allow(clippy::approx_constant)]
pub fn reply(text: &str) -> String {
    let Ok(people) = text.parse::<f64>() else {
        return format!("Não entendi a quantidade de pizzas: {text}");
    };

    if (1.0..=MAX_PEOPLE).contains(&people) {
        let mut msg = if (3.14..=3.141_592_65).contains(&people) {
            format!(
                "Para π pessoas, compre {:.0} π-zzas de 8 🍕.",
                pizzas(people, REGULAR_SLICES)
            )
        } else {
            format!(
                "Para {people:.0} pessoas, compre {:.0} pizzas de 8 🍕.",
                pizzas(people, REGULAR_SLICES)
            )
        };

        if people > MEGA_THRESHOLD {
            msg.push_str(" Para a quantidade de pessoas, também tem a pizza de 60cm da [Mega Pizza](http://mpizza.com.br/): ");
            msg.push_str(&format!(
                "cada uma tem 22 pedaços, então recomendo pedir {:.0} mega pizzas.",
                pizzas(people, MEGA_SLICES)
            ));
        } else {
            msg.push_str(" Uma opção é pedir na [Penedos](http://penedos.com.br/catalog) ([3396-5002](tel:+551933965002)) e pegar um imã/pizza. 8 deles trocam por uma pizza.");
        }
        msg
    } else if people == 0.0 {
        "Para nenhuma pessoa, é melhor nem comprar pizza".to_string()
    } else if people < 0.0 {
        "Número negativo de pizzas? Não viramos uma pizzaria".to_string()
    } else {
        // More than 100, NaN, or a fraction below one.
        "Mais que 100 pessoas no LHC? Isso vai dar overflow nos meus cálculos, se vira aí."
            .to_string()
    }
}

//! Mock battle deduction used when the model output is unusable.

use serde_json::{json, Value};

/// Strip a surrounding markdown code fence from model output.
///
/// Handles an opening ```` ```json ```` or ```` ``` ```` and a closing ```` ``` ````.
pub fn strip_code_fences(content: &str) -> &str {
    let mut body = content.trim();
    if let Some(rest) = body.strip_prefix("```json") {
        body = rest;
    } else if let Some(rest) = body.strip_prefix("```") {
        body = rest;
    }
    if let Some(rest) = body.strip_suffix("```") {
        body = rest;
    }
    body.trim()
}

fn step(time: &str, description: &str, actions: Vec<Value>) -> Value {
    json!({
        "time": time,
        "description": description,
        "actions": actions,
    })
}

fn marker(label: &str, coordinate: [f64; 2], color: &str) -> Value {
    json!({ "type": "marker", "label": label, "coordinate": coordinate, "color": color })
}

fn path(label: &str, points: &[[f64; 2]], color: &str, width: u32) -> Value {
    json!({ "type": "path", "label": label, "path": points, "color": color, "width": width })
}

fn arrow(label: &str, from: [f64; 2], to: [f64; 2], color: &str, width: u32) -> Value {
    json!({ "type": "arrow", "label": label, "from": from, "to": to, "color": color, "width": width })
}

fn circle(label: &str, center: [f64; 2], radius: u32, color: &str) -> Value {
    json!({ "type": "circle", "label": label, "center": center, "radius": radius, "color": color })
}

/// The 12-step Battle of Red Cliffs scenario, titled after the requested query.
///
/// Output is a pure function of `query`.
pub fn mock_deduction(query: &str) -> Value {
    let mut wind = arrow("东南风向", [114.0, 29.7], [113.8, 29.9], "cyan", 10);
    wind["opacity"] = json!(0.5);

    let steps = vec![
        step(
            "阶段 1: 战前部署 (建安十三年冬)",
            "曹操率八十万大军（实则二十余万）南下，水陆并进，驻扎于江北乌林。曹军船舰首尾相连，形成连环战船，意图克服北方士兵不习水战的弱点。江面之上，旌旗蔽空，声势浩大。",
            vec![
                marker("曹操大营 (乌林)", [113.88, 29.88], "red"),
                marker("曹军水寨", [113.90, 29.86], "red"),
                path("曹军防线", &[[113.85, 29.88], [113.95, 29.88]], "red", 5),
            ],
        ),
        step(
            "阶段 2: 联军集结",
            "孙刘联军约五万人，由周瑜、程普率领，驻扎于江南赤壁。周瑜采纳黄盖诈降之计，并与诸葛亮制定火攻策略。联军士气高昂，利用长江天险据守。",
            vec![
                marker("孙刘联军大营 (赤壁)", [113.92, 29.75], "blue"),
                marker("周瑜指挥所", [113.93, 29.74], "blue"),
                path("联军防线", &[[113.88, 29.76], [113.96, 29.76]], "blue", 5),
            ],
        ),
        step(
            "阶段 3: 草船借箭 (前奏)",
            "大雾弥漫之夜，诸葛亮率二十只草船逼近曹营。曹军因雾大不敢出战，只能乱箭射之。诸葛亮借得十万余支箭，既补充了军备，又打击了曹军士气。",
            vec![arrow("草船借箭路线", [113.92, 29.75], [113.90, 29.84], "green", 3)],
        ),
        step(
            "阶段 4: 苦肉计与诈降",
            "黄盖在军中受刑，向曹操诈降。曹操信以为真，约定受降日期。黄盖准备了十艘蒙冲斗舰，满载薪草膏油，外用帷幕伪装，插上牙旗。",
            vec![marker("黄盖先锋队", [113.91, 29.78], "orange")],
        ),
        step(
            "阶段 5: 东南风起",
            "是夜，东南风大起。诸葛亮在七星坛祭风（演义情节），实则预测气象。风向对联军极为有利，火攻条件成熟。",
            vec![wind],
        ),
        step(
            "阶段 6: 黄盖进军",
            "黄盖率领火船队乘风破浪，向曹军水寨疾驰。船队在江心升起风帆，速度极快。曹军以为黄盖来降，毫无戒备。",
            vec![arrow("黄盖突击", [113.91, 29.78], [113.90, 29.85], "orange", 8)],
        ),
        step(
            "阶段 7: 点火突袭",
            "离曹军二里许，黄盖下令点火。火船乘风冲入曹军水寨。曹军船舰被铁链锁住，无法散开，瞬间陷入火海。",
            vec![
                marker("起火点", [113.90, 29.86], "orange"),
                circle("火势蔓延", [113.90, 29.86], 2000, "red"),
            ],
        ),
        step(
            "阶段 8: 火烧连营",
            "火势借助风势，迅速蔓延至岸上曹军大营。烟焰涨天，人马烧溺死者甚众。曹军大乱，失去指挥。",
            vec![
                circle("全面火海", [113.88, 29.88], 5000, "red"),
                marker("曹营混乱", [113.88, 29.88], "black"),
            ],
        ),
        step(
            "阶段 9: 联军总攻",
            "周瑜率领轻锐主力紧随其后，雷鼓大震，杀入曹军大营。曹军大败，溃不成军。",
            vec![arrow("联军总攻", [113.92, 29.76], [113.88, 29.88], "blue", 10)],
        ),
        step(
            "阶段 10: 曹操败退",
            "曹操见大势已去，率领残部突围，经华容道向江陵方向撤退。途中道路泥泞，加上饥疫，死伤惨重。",
            vec![path(
                "曹操撤退路线",
                &[[113.88, 29.88], [113.80, 29.95], [113.60, 30.05]],
                "grey",
                4,
            )],
        ),
        step(
            "阶段 11: 追击与拦截",
            "刘备军在华容道等地设伏拦截（演义情节）。曹操虽狼狈逃脱，但元气大伤，失去了统一南方的机会。",
            vec![marker("关羽伏击点 (华容道)", [113.70, 30.00], "blue")],
        ),
        step(
            "阶段 12: 战后格局",
            "赤壁之战奠定了三国鼎立的基础。曹操退守北方，孙权巩固江东，刘备借机占领荆州大部，开启了三国时代。",
            vec![
                marker("荆州 (刘备)", [112.2, 30.3], "green"),
                marker("江东 (孙权)", [118.7, 32.0], "blue"),
                marker("北方 (曹操)", [114.5, 34.7], "red"),
            ],
        ),
    ];

    json!({
        "title": format!("赤壁之战 (演示数据 - 原请求: {})", query),
        "location": [113.9, 29.8],
        "zoom": 11,
        "steps": steps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn test_mock_deduction_shape() {
        let scenario = mock_deduction("官渡之战");
        assert_eq!(scenario["title"], "赤壁之战 (演示数据 - 原请求: 官渡之战)");
        assert_eq!(scenario["zoom"], 11);
        let steps = scenario["steps"].as_array().unwrap();
        assert_eq!(steps.len(), 12);
        assert_eq!(steps[4]["actions"][0]["opacity"], 0.5);
        assert_eq!(steps[6]["actions"][1]["type"], "circle");
    }

    #[test]
    fn test_mock_deduction_is_deterministic() {
        assert_eq!(mock_deduction("x"), mock_deduction("x"));
    }
}

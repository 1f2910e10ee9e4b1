// SPDX-License-Identifier: MIT

fn main() {
    std::process::exit(ckp_supervisord::run());
}
